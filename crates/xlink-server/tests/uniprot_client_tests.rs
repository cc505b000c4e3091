//! UniProtKB client against a mock HTTP server

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xlink_server::models::{GoAspect, LocationKind};
use xlink_server::uniprot::{LookupError, ProteinLookup, UniProtClient};

fn albumin_entry() -> serde_json::Value {
    json!({
        "primaryAccession": "P02769",
        "uniProtkbId": "ALBU_BOVIN",
        "organism": {
            "scientificName": "Bos taurus",
            "commonName": "Bovine",
            "taxonId": 9913
        },
        "proteinDescription": {
            "recommendedName": { "fullName": { "value": "Albumin" } }
        },
        "genes": [{ "geneName": { "value": "ALB" } }],
        "comments": [{
            "commentType": "SUBCELLULAR LOCATION",
            "subcellularLocations": [{
                "location": {
                    "value": "Secreted",
                    "id": "SL-0243",
                    "evidences": [{ "evidenceCode": "ECO:0000250", "source": "UniProtKB", "id": "P02768" }]
                }
            }]
        }],
        "uniProtKBCrossReferences": [
            {
                "database": "GO",
                "id": "GO:0005615",
                "properties": [{ "key": "GoTerm", "value": "C:extracellular space" }]
            },
            { "database": "STRING", "id": "9913.ENSBTAP00000022305" }
        ],
        "sequence": { "value": "MKWVTFISLLLLFSSAYS", "length": 18 }
    })
}

async fn client_for(server: &MockServer) -> UniProtClient {
    UniProtClient::new(server.uri(), Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn test_fetch_protein_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/P02769.json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(albumin_entry()))
        .expect(1)
        .mount(&server)
        .await;

    let record = client_for(&server).await.fetch_protein_record("P02769").await.expect("record");

    assert_eq!(record.accession, "P02769");
    assert_eq!(record.taxon_id, Some(9913));
    assert_eq!(record.gene_name.as_deref(), Some("ALB"));
    assert_eq!(record.protein_name.as_deref(), Some("Albumin"));
    assert_eq!(record.sequence_length, Some(18));
    assert_eq!(record.string_refs.as_deref(), Some("9913.ENSBTAP00000022305"));

    assert_eq!(record.go_terms.len(), 1);
    assert_eq!(record.go_terms[0].aspect, GoAspect::Component);
    assert_eq!(record.go_terms[0].term, "extracellular space");

    assert_eq!(record.subcellular_locations.len(), 1);
    let location = &record.subcellular_locations[0];
    assert_eq!(location.kind, LocationKind::Location);
    assert_eq!(location.value, "Secreted");
    assert_eq!(location.evidences.len(), 1);
}

#[tokio::test]
async fn test_fetch_organism() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/P02769.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(albumin_entry()))
        .mount(&server)
        .await;

    let organism = client_for(&server)
        .await
        .fetch_organism_for_accession("P02769")
        .await
        .expect("organism");

    assert_eq!(organism.taxon_id, 9913);
    assert_eq!(organism.scientific_name, "Bos taurus");
    assert_eq!(organism.common_name.as_deref(), Some("Bovine"));
}

#[tokio::test]
async fn test_entry_without_organism() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/P99999.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "primaryAccession": "P99999" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .fetch_organism_for_accession("P99999")
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::MissingOrganism(a) if a == "P99999"));
}

#[tokio::test]
async fn test_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/Q00001.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/Q00002.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uniprotkb/Q00003.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let not_found = client.fetch_protein_record("Q00001").await.unwrap_err();
    assert!(matches!(not_found, LookupError::NotFound(a) if a == "Q00001"));

    let failed = client.fetch_protein_record("Q00002").await.unwrap_err();
    assert!(matches!(failed, LookupError::Status { status: 500, .. }));

    let garbled = client.fetch_protein_record("Q00003").await.unwrap_err();
    assert!(matches!(garbled, LookupError::Decode { .. }));
}
