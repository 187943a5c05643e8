//! Normalization and validation of disbursement-platform records.
//!
//! The engine turns loosely typed upstream payloads (see the `api_types`
//! crate) into strict domain models, checks cross-field invariants, sums CSV
//! amounts with exact decimals and answers role/permission questions.
//!
//! Everything here is synchronous and free of I/O. Fatal problems are returned
//! as [`EngineError`]; inconsistencies that upstream is allowed to have are
//! logged through `tracing` as warnings and never block a caller.
//!
//! ```rust
//! use api_types::payment::Payment as RawPayment;
//! use engine::Engine;
//!
//! let raw: RawPayment = serde_json::from_str(
//!     r#"{"id": "p-1", "amount": "12.50", "asset": {"code": "USDC"}}"#,
//! )
//! .unwrap();
//! let payment = Engine::default().normalize_payment(&raw).unwrap();
//! assert_eq!(payment.disbursement_name, "Direct Payment");
//! ```

pub use asset::{Asset, AssetCode, AssetSummary};
pub use disbursement::{Disbursement, DisbursementStats, WalletSummary};
pub use error::EngineError;
pub use history::StatusChange;
pub use normalizer::{
    BatchFailure, BatchItem, BatchOutcome, Engine, EngineBuilder, RawRecord, Record,
};
pub use payment::Payment;
pub use receiver::{ReceivedAmount, Receiver, ReceiverWallet};
pub use roles::{Permission, Role, RoleInfo};
pub use status::{DisbursementStatus, EntityKind, PaymentStatus, Status};
pub use wallet_address::WalletAddress;

pub mod access;
pub mod aggregator;
pub mod amount;
mod asset;
mod disbursement;
mod error;
mod history;
mod normalizer;
mod payment;
mod receiver;
pub mod roles;
mod status;
pub mod transitions;
mod util;
pub mod validation;
pub mod wallet_address;
pub mod warnings;

pub type ResultEngine<T> = Result<T, EngineError>;
