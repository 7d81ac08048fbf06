use std::future::Future;
use std::pin::Pin;

use routesweep_geom::Point;

use crate::client::OracleClient;
use crate::profile::Profile;
use crate::response::OracleResponse;

/// Object-safe form of [`OracleClient::route`], for callers that need to
/// swap in a mock oracle (tests) or otherwise can't name a concrete type.
///
/// Ordinary callers should prefer `OracleClient::route` directly, which
/// doesn't pay for the boxed future this trait requires.
pub trait RoutingOracle: Send + Sync {
    fn route<'a>(
        &'a self,
        start: Point,
        end: Point,
        profile: Profile,
    ) -> Pin<Box<dyn Future<Output = OracleResponse> + Send + 'a>>;
}

impl RoutingOracle for OracleClient {
    fn route<'a>(
        &'a self,
        start: Point,
        end: Point,
        profile: Profile,
    ) -> Pin<Box<dyn Future<Output = OracleResponse> + Send + 'a>> {
        Box::pin(OracleClient::route(self, start, end, profile))
    }
}
