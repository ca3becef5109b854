//! The fixed topic -> operation table.

use std::collections::HashSet;
use std::sync::Arc;

use dtbus_core::{RemoteOperation, UnknownOperation};

use super::operation::OperationBinding;

/// Required-parameter lists used by the standard table.
const NONE: &[&str] = &[];
const QUERY: &[&str] = &["query"];
const IP: &[&str] = &["ip"];
const DOMAIN: &[&str] = &["domain"];

/// Every supported operation with its required parameters, in registration
/// order. The topic suffix is the operation name.
const STANDARD_ENTRIES: &[(RemoteOperation, &[&str])] = &[
    (RemoteOperation::AccountInformation, NONE),
    (RemoteOperation::BrandMonitor, QUERY),
    (RemoteOperation::DomainProfile, QUERY),
    (RemoteOperation::DomainSearch, QUERY),
    (RemoteOperation::DomainSuggestions, QUERY),
    (RemoteOperation::HostDomains, IP),
    (RemoteOperation::HostingHistory, QUERY),
    (RemoteOperation::IpMonitor, QUERY),
    (RemoteOperation::IpRegistrantMonitor, QUERY),
    (RemoteOperation::Iris, NONE),
    (RemoteOperation::NameServerMonitor, QUERY),
    (RemoteOperation::ParsedWhois, QUERY),
    (RemoteOperation::PhishEye, QUERY),
    (RemoteOperation::PhishEyeTermList, NONE),
    (RemoteOperation::RegistrantMonitor, QUERY),
    (RemoteOperation::Reputation, QUERY),
    (RemoteOperation::ReverseIp, DOMAIN),
    (RemoteOperation::ReverseIpWhois, NONE),
    (RemoteOperation::ReverseNameServer, QUERY),
    (RemoteOperation::ReverseWhois, QUERY),
    (RemoteOperation::Whois, QUERY),
    (RemoteOperation::WhoisHistory, QUERY),
];

/// Errors raised while building an [`OperationTable`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no remote operation named '{0}'")]
    UnknownOperation(String),
    #[error("topic suffix '{0}' is bound more than once")]
    DuplicateTopic(String),
}

impl From<UnknownOperation> for TableError {
    fn from(err: UnknownOperation) -> Self {
        Self::UnknownOperation(err.0)
    }
}

/// Ordered, read-only set of operation bindings.
///
/// The topic suffix is the remote operation name, so every binding resolves
/// to a real operation before any request is served.
#[derive(Debug, Clone)]
pub struct OperationTable {
    bindings: Vec<Arc<OperationBinding>>,
}

impl OperationTable {
    /// The table of every supported operation.
    #[must_use]
    pub fn standard() -> Self {
        let bindings = STANDARD_ENTRIES
            .iter()
            .map(|(operation, required)| {
                Arc::new(OperationBinding::new(
                    operation.name(),
                    *operation,
                    required.iter().copied(),
                ))
            })
            .collect();
        Self { bindings }
    }

    /// Builds a table from `(operation name, required parameters)` pairs,
    /// preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `TableError::UnknownOperation` if a name does not match a
    /// remote operation and `TableError::DuplicateTopic` if a name repeats.
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut bindings = Vec::with_capacity(entries.len());

        for (name, required) in entries {
            let operation: RemoteOperation = name.parse()?;
            if !seen.insert(*name) {
                return Err(TableError::DuplicateTopic((*name).to_string()));
            }
            bindings.push(Arc::new(OperationBinding::new(
                *name,
                operation,
                required.iter().copied(),
            )));
        }

        Ok(Self { bindings })
    }

    /// Finds the binding for a topic suffix.
    #[must_use]
    pub fn lookup(&self, suffix: &str) -> Option<&Arc<OperationBinding>> {
        self.bindings.iter().find(|b| b.topic_suffix() == suffix)
    }

    /// Bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<OperationBinding>> {
        self.bindings.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
