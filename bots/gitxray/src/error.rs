// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for gitxray

use thiserror::Error;

/// Main error type for gitxray
#[derive(Error, Debug)]
pub enum XrayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Context error: {0}")]
    Context(#[from] gitxray_shared_context::ContextError),

    #[error("Contributor(s) not found in {repository}: {logins:?}")]
    ContributorsNotFound {
        repository: String,
        logins: Vec<String>,
    },

    #[error("Dossier has no repository full name")]
    MissingRepository,

    #[error("Contributor #{index} in the dossier has a blank login")]
    BlankLogin { index: usize },
}

pub type Result<T> = std::result::Result<T, XrayError>;
