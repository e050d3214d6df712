mod article;
mod provider;

pub use provider::Provider;
