//! Bumper assets: head ident, tail ident and silence padding.
//!
//! Assets are immutable inputs. They are only ever read and re-encoded
//! into a per-job canonical copy; the silence clip is the one durable file
//! this crate creates on its own.

mod provisioner;

pub use provisioner::{AssetProvisioner, CanonicalAsset, SILENCE_SECONDS};
