pub mod category;
pub mod department;
pub mod designation;
pub mod news;
pub mod role;
pub mod user;

pub use category::{Categories, Category};
pub use department::{Department, Departments};
pub use designation::{Designation, Designations};
pub use news::{News, NewsArticles};
pub use role::{Role, Roles};
pub use user::{User, UserCredentials, Users};
