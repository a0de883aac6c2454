//! # Hierarch
//!
//! **Declarative engine for hierarchical, versioned REST resources**
//!
//! A service declares resource types, how they nest, which roles may call
//! each method and which representation each version exchanges. Hierarch
//! derives the routes and runs every request through one fixed pipeline:
//!
//! ```text
//! route → method → authorize → negotiate → version → parse + validate
//!                                                         ↓
//! response ← shape check ← handler ← resource chain ←─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hierarch::prelude::*;
//!
//! fn build() -> SetupResult<Service> {
//!     let config = ConfigLoader::new().with_defaults().with_env_prefix("USERS").load()?;
//!     init_logging(&config.logging.to_log_config())?;
//!
//!     let mut builder = Service::builder().config(&config).credentials(Tokens::default());
//!     builder.register::<UserRepresentation>()?;
//!     builder.resource(UsersHandler::new());
//!     builder.build()
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hierarch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Value types and the transport contract
pub use hierarch_core as core;

// Route tree
pub use hierarch_router as router;

// Roles, credentials and per-method authorizers
pub use hierarch_authz as authz;

// Layered configuration
pub use hierarch_config as config;

// Logging and metrics
pub use hierarch_telemetry as telemetry;

// Setup and request pipeline
pub use hierarch_dispatch as dispatch;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use hierarch::prelude::*;
/// ```
pub mod prelude {
    pub use hierarch_core::{
        AccessMismatchPolicy, BoxFuture, ClientErrorResponse, FieldSpec, IdFormat, Identity,
        InboundBody, InboundRequest, Method, MethodKey, OutboundResponse, RepresentationCodec,
        RepresentationPair, Resource, ResourceChain, ResourceId, ResourceRequest,
        ResourceResponse, Schema, ServerErrorResponse, SetupError, SetupResult, SuccessResponse,
        ValueKind,
    };

    pub use hierarch_authz::{
        CredentialError, CredentialResolver, ResourceAccessInfo, StaticCredentials,
    };

    pub use hierarch_config::{ConfigError, ConfigLoader, ServiceConfig};

    pub use hierarch_telemetry::{init_logging, init_metrics, LogConfig, LogFormat};

    pub use hierarch_dispatch::{
        HandlerId, HandlerResult, ResourceHandler, Service, ServiceBuilder,
    };
}
