//! Shared fixtures for the integration tests
//!
//! Everything runs against [`MemoryStore`] and a scripted [`ProteinLookup`],
//! so no database or network is needed. Uploads are staged in a temporary
//! directory that lives as long as the [`TestEnv`].

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use xlink_server::db::{MemoryStore, OrganelleRepository, SharedStore, UserRepository};
use xlink_server::features::{self, organelles::commands::seed, AppState};
use xlink_server::ingest::{CrosslinkImporter, ImporterSettings};
use xlink_server::middleware::auth::Claims;
use xlink_server::models::{NewUser, Organelle, User};
use xlink_server::uniprot::{LookupError, OrganismInfo, ProteinLookup, ProteinRecord};

pub const JWT_SECRET: &str = "integration-test-secret-0123";
pub const BOVINE: i32 = 9913;
pub const HUMAN: i32 = 9606;

const HUMAN_ACCESSIONS: [&str; 2] = ["P68871", "P69905"];

/// Answers like the sequence database would for a small, fixed world.
///
/// Human accessions resolve to 9606, everything else to 9913. Accessions
/// marked as failing return `NotFound`; `unavailable` makes every call fail
/// with HTTP 503.
#[derive(Default)]
pub struct ScriptedLookup {
    failing: HashSet<String>,
    pub unavailable: AtomicBool,
    pub protein_calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(accessions: &[&str]) -> Self {
        Self {
            failing: accessions.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.protein_calls.load(Ordering::SeqCst)
    }

    fn check(&self, accession: &str) -> Result<(), LookupError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LookupError::Status {
                accession: accession.to_string(),
                status: 503,
            });
        }
        if self.failing.contains(accession) {
            return Err(LookupError::NotFound(accession.to_string()));
        }
        Ok(())
    }

    fn organism(accession: &str) -> OrganismInfo {
        if HUMAN_ACCESSIONS.contains(&accession) {
            OrganismInfo {
                taxon_id: HUMAN,
                scientific_name: "Homo sapiens".to_string(),
                common_name: Some("Human".to_string()),
            }
        } else {
            OrganismInfo {
                taxon_id: BOVINE,
                scientific_name: "Bos taurus".to_string(),
                common_name: Some("Bovine".to_string()),
            }
        }
    }
}

#[async_trait]
impl ProteinLookup for ScriptedLookup {
    async fn fetch_protein_record(&self, accession: &str) -> xlink_server::uniprot::Result<ProteinRecord> {
        self.protein_calls.fetch_add(1, Ordering::SeqCst);
        self.check(accession)?;
        Ok(ProteinRecord {
            accession: accession.to_string(),
            taxon_id: Some(Self::organism(accession).taxon_id),
            gene_name: Some(format!("GENE_{accession}")),
            protein_name: Some(format!("Protein {accession}")),
            sequence: Some("MKWVTFISLLLLFSSAYS".to_string()),
            sequence_length: Some(18),
            go_terms: Vec::new(),
            subcellular_locations: Vec::new(),
            string_refs: Some(format!("9913.ENSBTAP{accession}")),
        })
    }

    async fn fetch_organism_for_accession(&self, accession: &str) -> xlink_server::uniprot::Result<OrganismInfo> {
        self.check(accession)?;
        Ok(Self::organism(accession))
    }
}

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub lookup: Arc<ScriptedLookup>,
    pub state: AppState,
    pub user: User,
    upload_dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_lookup(ScriptedLookup::new()).await
    }

    pub async fn with_lookup(lookup: ScriptedLookup) -> Self {
        let store = Arc::new(MemoryStore::new());
        let lookup = Arc::new(lookup);
        let upload_dir = tempfile::tempdir().expect("temp dir");

        let settings = ImporterSettings {
            upload_dir: upload_dir.path().to_path_buf(),
            chunk_size: 2,
            concurrency: 2,
            organelle_case_insensitive: false,
        };
        let shared: SharedStore = store.clone();
        let state = AppState::new(shared, lookup.clone(), settings, JWT_SECRET).expect("state");

        seed::handle(store.as_ref()).await.expect("organelle catalog");
        let user = store
            .insert_user_if_absent(&NewUser {
                email: "researcher@lab.org".to_string(),
                first_name: Some("Ada".to_string()),
                last_name: None,
            })
            .await
            .expect("user");

        Self {
            store,
            lookup,
            state,
            user,
            upload_dir,
        }
    }

    pub fn importer(&self) -> &CrosslinkImporter {
        &self.state.importer
    }

    pub fn upload_dir(&self) -> &std::path::Path {
        self.upload_dir.path()
    }

    pub fn router(&self) -> Router {
        features::router(self.state.clone())
    }

    pub async fn other_user(&self, email: &str) -> User {
        self.store
            .insert_user_if_absent(&NewUser {
                email: email.to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .expect("user")
    }

    pub async fn organelle(&self, name: &str) -> Organelle {
        self.store
            .find_organelle_by_name(name, false)
            .await
            .expect("lookup")
            .expect("catalog organelle")
    }

    pub fn token(&self, user: &User) -> String {
        let claims = Claims {
            sub: user.id.to_string(),
            email: Some(user.email.clone()),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("token")
    }
}

/// Three bovine crosslinks over two accessions.
pub const BOVINE_CSV: &str = "Protein1,Protein2,AbsPos1,AbsPos2,Score\n\
P02769,P02769,12,40,0.91\n\
P02769,P00760,55,8,0.5\n\
P00760,,101,7,\n";

/// Two more bovine crosslinks, disjoint from [`BOVINE_CSV`].
pub const BOVINE_EXTRA_CSV: &str = "uniprot1;uniprot2;abspos1;abspos2;score\n\
P02769;P00760;200;30;0.7\n\
P00760;P00760;3;9;\n";

/// One human crosslink.
pub const HUMAN_CSV: &str = "Protein1,Protein2,AbsPos1,AbsPos2\nP68871,P69905,10,20\n";
