//! Database models.

pub mod banner;
pub mod branding;
pub mod colors;
pub mod generals;
pub mod info;
pub mod section;
pub mod settings;
pub mod show;
pub mod venue;

pub use banner::{Banner, CreateBanner, UpdateBanner};
pub use branding::{Branding, UpdateBranding};
pub use colors::{Colors, UpdateColors};
pub use generals::Generals;
pub use info::{Info, UpdateInfo};
pub use section::{CreateSection, Section, UpdateSection};
pub use settings::{Settings, UpdateSettings};
pub use show::{Show, ShowInput, ShowSummary, ShowUrl};
pub use venue::{Venue, VenueInput};
