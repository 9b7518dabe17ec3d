// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Latest-wins list fetching driven by filters and server events.

mod fetcher;
mod filters;

pub use fetcher::{CoordinatedFetcher, FetchConfig, FetchOutcome, FetchState, UpdateAction};
pub use filters::Filters;
