pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod policy;
pub mod query;
pub mod slot_lock;
pub mod store;
pub mod supabase_store;
pub mod view;

pub use booking::{AppointmentBookingService, Collaborators};
pub use conflict::ConflictDetectionService;
pub use lifecycle::AppointmentLifecycleService;
pub use policy::{authorize, Action, Ownership};
pub use query::AppointmentQueryService;
pub use slot_lock::{SlotGuard, SlotLocks};
pub use store::{AppointmentStore, InMemoryAppointmentStore, StoreError};
pub use supabase_store::SupabaseAppointmentStore;
pub use view::AppointmentViewResolver;
