pub mod cashflow;
pub mod dashboard;
pub mod date_range;
pub mod documents;
pub mod presentation;
pub mod seed;
pub mod settings;
pub mod state;
pub mod store;
pub mod upload;
