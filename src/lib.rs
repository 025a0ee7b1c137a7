// Library for tests to access modules

pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod monitors;
pub mod pipeline;
pub mod provider;
pub mod ranking;
pub mod routes;
pub mod status;
pub mod tree;
pub mod version;
pub mod worker;
