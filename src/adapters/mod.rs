pub mod espn;
pub mod http_client;
pub mod streamed;

pub use espn::EspnApi;
pub use http_client::{HttpClient, JsonFetch, ProbeOutcome, RetryPolicy};
pub use streamed::{ImageResolver, MatchFeed, MatchSnapshot, RawMatch, RawSource, RawTeam, RawTeams};
