//! Site configuration

mod site;

pub use site::{CheckoutConfig, SiteConfig};
