//! Database entities.

#![allow(missing_docs)]

pub mod city;
pub mod comment;
pub mod curtida;
pub mod knowledge;
pub mod legacy_person;
pub mod memory;
pub mod posting;
pub mod profile;
pub mod profile_favorite_city;
pub mod report;
pub mod state;

pub use city::Entity as City;
pub use comment::Entity as Comment;
pub use curtida::Entity as Curtida;
pub use knowledge::Entity as Knowledge;
pub use legacy_person::Entity as LegacyPerson;
pub use memory::Entity as Memory;
pub use posting::Entity as Posting;
pub use profile::Entity as Profile;
pub use profile_favorite_city::Entity as ProfileFavoriteCity;
pub use report::Entity as Report;
pub use state::Entity as State;
