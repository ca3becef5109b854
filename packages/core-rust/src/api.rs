//! Remote domain-intelligence API contract.
//!
//! The HTTP client for the DomainTools REST API is an external SDK. This
//! module fixes the shape the service depends on: one async method per named
//! remote operation, each taking the request's named parameters and returning
//! a data payload or an [`ApiError`].
//!
//! [`RemoteOperation`] is the closed set of operation names. Resolving a name
//! happens once, when the operation table is built; a request never looks a
//! method up by string.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Named parameters forwarded to a remote operation.
pub type Params = Map<String, Value>;

// ---------------------------------------------------------------------------
// ApiResponse / ApiError
// ---------------------------------------------------------------------------

/// Successful result of a remote operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    data: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// The `response` section of the remote reply. A JSON object for
    /// `format=json`; a string document for `format=xml`.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Value {
        self.data
    }
}

/// Failure kinds the remote service reports in a structured way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    BadRequest,
    NotAuthorized,
    NotFound,
    InternalServerError,
    ServiceUnavailable,
    IncompleteResponse,
    RequestUriTooLong,
    /// Any structured failure without a more specific kind.
    Service,
}

impl ServiceErrorKind {
    /// The SDK's name for this failure kind, as shown to bus clients.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequestException",
            Self::NotAuthorized => "NotAuthorizedException",
            Self::NotFound => "NotFoundException",
            Self::InternalServerError => "InternalServerErrorException",
            Self::ServiceUnavailable => "ServiceUnavailableException",
            Self::IncompleteResponse => "IncompleteResponseException",
            Self::RequestUriTooLong => "RequestUriTooLongException",
            Self::Service => "ServiceException",
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure of a remote operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The remote service rejected the call with a machine-oriented reason
    /// (rate limiting, invalid query, authorization, ...).
    #[error("{kind}: {reason}")]
    Service {
        kind: ServiceErrorKind,
        reason: String,
    },
    /// Anything else: transport failure, malformed reply, client bug.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn service(kind: ServiceErrorKind, reason: impl Into<String>) -> Self {
        Self::Service {
            kind,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation set
// ---------------------------------------------------------------------------

/// Error returned when an operation name is not part of the remote API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown remote operation: {0}")]
pub struct UnknownOperation(pub String);

/// Generates [`RemoteOperation`], the [`DomainApi`] trait with one method per
/// operation, and the static name -> method mapping in
/// [`RemoteOperation::invoke`].
macro_rules! remote_operations {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $method:ident
        ),+ $(,)?
    ) => {
        /// Every operation the remote API exposes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum RemoteOperation {
            $( $(#[$meta])* $variant, )+
        }

        impl RemoteOperation {
            /// All operations, in declaration order.
            pub const ALL: &'static [RemoteOperation] = &[ $( RemoteOperation::$variant, )+ ];

            /// The remote API's name for this operation.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($method), )+
                }
            }

            /// Calls the bound method on `api`, forwarding `params` as its
            /// named arguments.
            ///
            /// # Errors
            ///
            /// Returns whatever the remote call returns.
            pub async fn invoke(
                self,
                api: &dyn DomainApi,
                params: Params,
            ) -> Result<ApiResponse, ApiError> {
                match self {
                    $( Self::$variant => api.$method(params).await, )+
                }
            }
        }

        /// Client for the remote domain-intelligence API.
        ///
        /// Implementations must be safe for concurrent use: the service shares
        /// one client across all in-flight requests.
        #[async_trait]
        pub trait DomainApi: Send + Sync {
            $(
                $(#[$meta])*
                async fn $method(&self, params: Params) -> Result<ApiResponse, ApiError>;
            )+
        }

        #[cfg(any(test, feature = "test-util"))]
        #[async_trait]
        impl DomainApi for crate::stub::StubApi {
            $(
                async fn $method(&self, params: Params) -> Result<ApiResponse, ApiError> {
                    self.answer(RemoteOperation::$variant, params)
                }
            )+
        }
    };
}

remote_operations! {
    /// Account usage and limits.
    AccountInformation => account_information,
    /// Brand monitor: new domains containing a brand term.
    BrandMonitor => brand_monitor,
    DomainProfile => domain_profile,
    DomainSearch => domain_search,
    DomainSuggestions => domain_suggestions,
    /// Domains hosted on an IP address.
    HostDomains => host_domains,
    HostingHistory => hosting_history,
    IpMonitor => ip_monitor,
    IpRegistrantMonitor => ip_registrant_monitor,
    Iris => iris,
    NameServerMonitor => name_server_monitor,
    ParsedWhois => parsed_whois,
    PhishEye => phisheye,
    PhishEyeTermList => phisheye_term_list,
    RegistrantMonitor => registrant_monitor,
    Reputation => reputation,
    /// IP addresses a domain resolves to, and their co-hosted domains.
    ReverseIp => reverse_ip,
    ReverseIpWhois => reverse_ip_whois,
    ReverseNameServer => reverse_name_server,
    ReverseWhois => reverse_whois,
    Whois => whois,
    WhoisHistory => whois_history,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RemoteOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    #[test]
    fn operation_names_are_unique() {
        let names: HashSet<_> = RemoteOperation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), RemoteOperation::ALL.len());
        assert_eq!(RemoteOperation::ALL.len(), 22);
    }

    #[test]
    fn names_parse_back_to_operations() {
        for op in RemoteOperation::ALL {
            assert_eq!(op.name().parse::<RemoteOperation>().unwrap(), *op);
        }
        assert_eq!(RemoteOperation::PhishEye.name(), "phisheye");
        assert_eq!(RemoteOperation::ReverseIp.to_string(), "reverse_ip");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "whoami".parse::<RemoteOperation>().unwrap_err();
        assert_eq!(err, UnknownOperation("whoami".to_string()));
        assert_eq!(err.to_string(), "unknown remote operation: whoami");
    }

    #[test]
    fn service_error_displays_kind_and_reason() {
        let err = ApiError::service(ServiceErrorKind::NotFound, "no such domain");
        assert_eq!(err.to_string(), "NotFoundException: no such domain");
    }

    #[test]
    fn unexpected_error_is_transparent() {
        let err = ApiError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn api_response_exposes_data() {
        let res = ApiResponse::new(json!({"domain": "example.com"}));
        assert_eq!(res.data()["domain"], "example.com");
        assert_eq!(res.into_data(), json!({"domain": "example.com"}));
    }
}
