use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use doctor_cell::services::{parse_date, DoctorDirectory};
use performance_cell::CacheStore;
use shared_models::auth::{CallerIdentity, Role};

use crate::models::{
    AppointmentError, AppointmentFilter, AppointmentListing, AppointmentQueryParams,
    AppointmentView, CacheStatus,
};
use crate::services::store::AppointmentStore;
use crate::services::view::AppointmentViewResolver;

pub const CACHE_PREFIX: &str = "appointments:";

/// Role-scoped listings behind a read-through cache.
pub struct AppointmentQueryService {
    store: Arc<dyn AppointmentStore>,
    doctors: Arc<dyn DoctorDirectory>,
    resolver: AppointmentViewResolver,
    cache: Arc<dyn CacheStore>,
    cache_ttl: Duration,
}

impl AppointmentQueryService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        doctors: Arc<dyn DoctorDirectory>,
        resolver: AppointmentViewResolver,
        cache: Arc<dyn CacheStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self { store, doctors, resolver, cache, cache_ttl }
    }

    pub async fn retrieve(
        &self,
        caller: &CallerIdentity,
        params: AppointmentQueryParams,
    ) -> Result<AppointmentListing, AppointmentError> {
        let Some(filter) = self.scoped_filter(caller, params).await? else {
            debug!("Doctor user {} has no doctor profile; nothing to list", caller.user_id);
            return Ok(AppointmentListing {
                appointments: Vec::new(),
                cache: CacheStatus::Miss,
            });
        };

        let key = cache_key(caller.role, &filter);
        let mut degraded = false;

        match self.cache.get(&key).await {
            Ok(Some(snapshot)) => match serde_json::from_str::<Vec<AppointmentView>>(&snapshot) {
                Ok(appointments) => {
                    return Ok(AppointmentListing {
                        appointments,
                        cache: CacheStatus::Hit,
                    });
                }
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => {
                warn!("Cache read failed for {}, falling back to persistence: {}", key, e);
                degraded = true;
            }
        }

        let mut appointments = self.store.query(&filter).await?;
        appointments.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        let views = self.resolver.resolve_all(&appointments).await;

        match serde_json::to_string(&views) {
            Ok(snapshot) => {
                if let Err(e) = self.cache.set_with_expiry(&key, &snapshot, self.cache_ttl).await {
                    warn!("Cache population failed for {}: {}", key, e);
                    degraded = true;
                }
            }
            Err(e) => {
                warn!("Could not serialise listing for {}: {}", key, e);
                degraded = true;
            }
        }

        Ok(AppointmentListing {
            appointments: views,
            cache: if degraded { CacheStatus::Degraded } else { CacheStatus::Miss },
        })
    }

    /// Drops every cached listing. Returns false when the cache could not
    /// be reached; the write that triggered it still stands.
    pub async fn invalidate(&self) -> bool {
        match self.cache.invalidate_prefix(CACHE_PREFIX).await {
            Ok(removed) => {
                if removed > 0 {
                    info!("Invalidated {} cached appointment listings", removed);
                }
                true
            }
            Err(e) => {
                warn!("Cache invalidation failed, listings may be stale until expiry: {}", e);
                false
            }
        }
    }

    /// Pins patients and doctors to their own appointments. `None` means
    /// the caller can own nothing.
    async fn scoped_filter(
        &self,
        caller: &CallerIdentity,
        params: AppointmentQueryParams,
    ) -> Result<Option<AppointmentFilter>, AppointmentError> {
        let date = match params.date.as_deref() {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| AppointmentError::InvalidDate(raw.to_string()))?),
            None => None,
        };

        let mut filter = AppointmentFilter {
            doctor_id: params.doctor_id,
            patient_id: params.patient_id,
            date,
            status: params.status,
        };

        match caller.role {
            Role::Admin => {}
            Role::Patient => filter.patient_id = Some(caller.user_id),
            Role::Doctor => match self.doctors.find_doctor_by_user(caller.user_id).await? {
                Some(doctor) => filter.doctor_id = Some(doctor.id),
                None => return Ok(None),
            },
        }

        Ok(Some(filter))
    }
}

/// Deterministic key over the role and every filter slot.
pub fn cache_key(role: Role, filter: &AppointmentFilter) -> String {
    fn part<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string())
    }

    format!(
        "{}{}:doctor={}:patient={}:date={}:status={}",
        CACHE_PREFIX,
        role,
        part(filter.doctor_id),
        part(filter.patient_id),
        part(filter.date),
        part(filter.status),
    )
}
