pub mod employer;
pub mod employment;
pub mod registration;
pub mod section;
pub mod user;

pub use employer::{Employer, EmployerSummary, Employee, NewEmployer};
pub use employment::{EmployerRef, Employment, EmploymentInput, EmploymentRecord};
pub use registration::{NewRegistration, RegistrationRequest};
pub use section::{Section, SectionInput, SectionWithCount};
pub use user::{AdminUserUpdate, EmploymentStatus, NewUser, ProfileUpdate, User};
