//! Localized names of units of measurement.

use std::sync::Arc;

use tracing::debug;

use crate::application::repos::{RepoError, UnitRepo};
use crate::cache::{MemoryCache, UnitKey};
use crate::domain::types::Lang;
use crate::runtime::{RuntimeStats, RuntimeTracker};

pub const COMPONENT: &str = "UnitService";

pub struct UnitService {
    repo: Arc<dyn UnitRepo>,
    lang: Lang,
    tracker: RuntimeTracker,
    names: MemoryCache<UnitKey, Option<String>>,
}

impl UnitService {
    pub fn new(repo: Arc<dyn UnitRepo>, lang: Lang, stats: &RuntimeStats) -> Self {
        Self {
            repo,
            lang,
            tracker: RuntimeTracker::new(COMPONENT, stats),
            names: MemoryCache::new("unit.name"),
        }
    }

    /// Name of the unit with the given key (`C62`, `KGM`, ...) in `lang`.
    pub async fn get_unit_name_by_key(
        &self,
        unit_key: &str,
        lang: Option<&Lang>,
    ) -> Result<Option<String>, RepoError> {
        let lang = lang.unwrap_or(&self.lang);
        self.tracker
            .instrument("get_unit_name_by_key", async {
                let key = UnitKey::Name {
                    unit_key: unit_key.to_string(),
                    lang: lang.clone(),
                };
                self.names
                    .get_or_try_insert_with(key, || async {
                        let Some(id) = self.repo.unit_id_by_key(unit_key).await? else {
                            debug!(unit_key, "unknown unit key");
                            return Ok(None);
                        };
                        self.repo.unit_name(id, lang).await
                    })
                    .await
            })
            .await
    }
}
