use axum::http::{header, HeaderMap, HeaderValue};
use time::Duration;

use crate::users::repo_types::Role;

pub const ADMIN_COOKIE: &str = "adminToken";
pub const PATIENT_COOKIE: &str = "patientToken";

/// Attributes every session cookie carries. A cleared cookie must repeat the
/// attributes it was created with or browsers silently keep the old value,
/// so attach and detach both build through `cookie_value`.
const ATTRIBUTES: &str = "Path=/; HttpOnly; Secure; SameSite=None";

/// Admin sessions ride their own cookie; patients and doctors share the
/// patient one. One browser can hold a dashboard and a frontend session at
/// the same time without collision.
pub fn cookie_name(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_COOKIE,
        Role::Patient | Role::Doctor => PATIENT_COOKIE,
    }
}

fn cookie_value(name: &str, token: &str, max_age: Duration) -> anyhow::Result<HeaderValue> {
    let value = format!(
        "{}={}; {}; Max-Age={}",
        name,
        token,
        ATTRIBUTES,
        max_age.whole_seconds()
    );
    HeaderValue::from_str(&value).map_err(|e| anyhow::anyhow!("session cookie header: {e}"))
}

/// Append a `Set-Cookie` binding the token to the role's cookie for `ttl`.
pub fn attach(
    headers: &mut HeaderMap,
    role: Role,
    token: &str,
    ttl: Duration,
) -> anyhow::Result<()> {
    let value = cookie_value(cookie_name(role), token, ttl)?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}

/// Append a `Set-Cookie` clearing the role's cookie: empty value, Max-Age 0,
/// and the exact attribute set `attach` uses.
pub fn detach(headers: &mut HeaderMap, role: Role) -> anyhow::Result<()> {
    let value = cookie_value(cookie_name(role), "", Duration::ZERO)?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}

/// Read a named cookie from the request's `Cookie` headers. A present but
/// empty cookie (the shape `detach` leaves behind) reads as absent.
pub fn extract(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(str::to_string)
        .filter(|token| !token.is_empty())
}
