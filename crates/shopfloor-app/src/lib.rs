// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod error;
pub mod forms;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod presets;
pub mod query;
pub mod resolve;
pub mod service;
pub mod state;

pub use error::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use normalize::*;
pub use presets::*;
pub use query::*;
pub use resolve::*;
pub use service::*;
pub use state::*;
