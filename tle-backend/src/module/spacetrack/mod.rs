//! Space-Track archive source
//!
//! - `query`: positional query path builder
//! - `client`: cookie-session HTTP client and scoped login/logout
//! - `credentials`: account read from the environment

mod client;
mod credentials;
mod error;
mod query;

pub use client::{
    ArchiveRow, DEFAULT_BASE_URL, LOGIN_PATH, LOGOUT_PATH, SpaceTrackClient, check_login_response, parse_rows,
    tle_records_from_rows, with_session,
};
pub use credentials::{Credentials, PASS_ENV, USER_ENV};
pub use error::SpaceTrackError;
pub use query::{
    ArchiveQuery, FORMAT_SEGMENT, NamedQuery, QUERY_ROOT, QueryError, encode_spaces,
    epoch_segment,
};
