pub mod availability;
pub mod directory;
pub mod supabase_directory;

pub use availability::{is_available, parse_date, weekday_name};
pub use directory::{DoctorDirectory, HospitalDirectory, InMemoryDirectory, UserDirectory};
pub use supabase_directory::SupabaseDirectory;
