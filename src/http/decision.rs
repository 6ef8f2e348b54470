//! # Decision engine
//!
//! A pure, `axum`-free function mapping `(method, exists, mutable, auth)` to
//! a [`Decision`]. No I/O, no storage access, no async — the transport
//! layer (`server.rs`, `handlers/*`) decodes a request into these inputs,
//! calls `decide`, and renders the result; it never re-derives the table
//! itself.

use std::fmt;

/// The five methods this surface supports. Anything else is rejected by
/// the router before `decide` is ever called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Head,
    Get,
    Put,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// The caller's authentication/authorization standing toward the targeted
/// resource, already resolved by the time `decide` is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Auth {
    pub authenticated: bool,
    /// Only consulted when `!authenticated`: whether the resource carries
    /// the public-permission tag.
    pub public: bool,
    /// Only consulted when `authenticated && exists`: whether the caller's
    /// account matches the resource's owner, or the resource is addressed
    /// by citation (citations are always public).
    pub authorized: bool,
}

/// One cell of the method/status matrix (§4.5). `Outcome` carries enough
/// for the transport layer to render a response without consulting the
/// table again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 401, with a `WWW-Authenticate: Nebula-Credentials` challenge.
    Unauthenticated,
    /// 404.
    NotFound,
    /// 403.
    Forbidden,
    /// 409 (immutable-write conflict).
    Conflict,
    /// 200, empty body (HEAD only).
    OkEmpty,
    /// 200.
    Ok,
    /// 201, body is the new citation.
    Created,
    /// 405 (method not accepted for this resource type at all).
    MethodNotAllowed,
}

impl Decision {
    pub fn status_code(self) -> u16 {
        match self {
            Decision::Unauthenticated => 401,
            Decision::NotFound => 404,
            Decision::Forbidden => 403,
            Decision::Conflict => 409,
            Decision::OkEmpty | Decision::Ok => 200,
            Decision::Created => 201,
            Decision::MethodNotAllowed => 405,
        }
    }
}

/// Apply the method matrix from §4.5. `exists` and `mutable` describe the
/// targeted resource; `auth` the caller's standing toward it.
pub fn decide(method: Method, exists: bool, mutable: bool, auth: Auth) -> Decision {
    if !auth.authenticated {
        let visible = exists && auth.public;
        return match method {
            Method::Head if visible => Decision::OkEmpty,
            Method::Get if visible => Decision::Ok,
            _ => Decision::Unauthenticated,
        };
    }

    if !exists {
        return match method {
            Method::Put => Decision::Created,
            _ => Decision::NotFound,
        };
    }

    if !auth.authorized {
        return Decision::Forbidden;
    }

    match method {
        Method::Head | Method::Get => Decision::Ok,
        Method::Put if mutable => Decision::Ok,
        Method::Put => Decision::Conflict,
        Method::Post => Decision::Created,
        Method::Delete => Decision::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anon(public: bool) -> Auth {
        Auth { authenticated: false, public, authorized: false }
    }

    fn authed(authorized: bool) -> Auth {
        Auth { authenticated: true, public: false, authorized }
    }

    #[test]
    fn test_unauthenticated_nonexistent_is_401_for_every_method() {
        for method in [Method::Head, Method::Get, Method::Put, Method::Post, Method::Delete] {
            assert_eq!(decide(method, false, true, anon(false)).status_code(), 401, "{method}");
        }
    }

    #[test]
    fn test_unauthenticated_public_allows_read_only() {
        assert_eq!(decide(Method::Head, true, true, anon(true)), Decision::OkEmpty);
        assert_eq!(decide(Method::Get, true, true, anon(true)), Decision::Ok);
        assert_eq!(decide(Method::Put, true, true, anon(true)).status_code(), 401);
        assert_eq!(decide(Method::Post, true, true, anon(true)).status_code(), 401);
        assert_eq!(decide(Method::Delete, true, true, anon(true)).status_code(), 401);
    }

    #[test]
    fn test_unauthenticated_non_public_existing_resource_is_401() {
        assert_eq!(decide(Method::Get, true, true, anon(false)).status_code(), 401);
    }

    #[test]
    fn test_authenticated_nonexistent_allows_put_only() {
        assert_eq!(decide(Method::Put, false, true, authed(true)), Decision::Created);
        assert_eq!(decide(Method::Head, false, true, authed(true)).status_code(), 404);
        assert_eq!(decide(Method::Get, false, true, authed(true)).status_code(), 404);
        assert_eq!(decide(Method::Post, false, true, authed(true)).status_code(), 404);
        assert_eq!(decide(Method::Delete, false, true, authed(true)).status_code(), 404);
    }

    #[test]
    fn test_authenticated_exists_unauthorized_is_403_for_every_method() {
        for method in [Method::Head, Method::Get, Method::Put, Method::Post, Method::Delete] {
            assert_eq!(decide(method, true, true, authed(false)).status_code(), 403, "{method}");
        }
    }

    #[test]
    fn test_authenticated_exists_authorized_mutable() {
        assert_eq!(decide(Method::Head, true, true, authed(true)), Decision::Ok);
        assert_eq!(decide(Method::Get, true, true, authed(true)), Decision::Ok);
        assert_eq!(decide(Method::Put, true, true, authed(true)), Decision::Ok);
        assert_eq!(decide(Method::Post, true, true, authed(true)), Decision::Created);
        assert_eq!(decide(Method::Delete, true, true, authed(true)), Decision::Ok);
    }

    #[test]
    fn test_authenticated_exists_authorized_immutable() {
        assert_eq!(decide(Method::Head, true, false, authed(true)), Decision::Ok);
        assert_eq!(decide(Method::Get, true, false, authed(true)), Decision::Ok);
        assert_eq!(decide(Method::Put, true, false, authed(true)), Decision::Conflict);
        assert_eq!(decide(Method::Post, true, false, authed(true)), Decision::Created);
        assert_eq!(decide(Method::Delete, true, false, authed(true)), Decision::Ok);
    }
}
