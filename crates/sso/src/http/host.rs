use url::Url;

/// Host name of `raw`, without port. Returns an empty string when `raw` does
/// not parse as an absolute URL.
///
/// The host is taken from the authority as written: no lowercasing and no
/// punycode, since the provider signs and compares the literal text.
pub fn host_from_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return String::new();
    };
    match raw_authority(raw.trim()) {
        Some(authority) => strip_port(authority).to_string(),
        None => url
            .host_str()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']').to_string())
            .unwrap_or_default(),
    }
}

/// `host[:port]` between `scheme://` and the path, userinfo removed.
fn raw_authority(raw: &str) -> Option<&str> {
    let (_, rest) = raw.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    Some(authority.rsplit_once('@').map_or(authority, |(_, host)| host))
}

fn strip_port(authority: &str) -> &str {
    if let Some(bracketed) = authority.strip_prefix('[') {
        return bracketed.split_once(']').map_or(bracketed, |(host, _)| host);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_port() {
        assert_eq!(
            host_from_url("https://accounts.example.com:8443/path"),
            "accounts.example.com"
        );
    }

    #[test]
    fn keeps_host_without_port() {
        assert_eq!(host_from_url("https://accounts.example.com/path"), "accounts.example.com");
        assert_eq!(host_from_url("https://sso.example.com"), "sso.example.com");
        assert_eq!(host_from_url("https://sso.example.com?x=1"), "sso.example.com");
    }

    #[test]
    fn malformed_url_is_empty() {
        assert_eq!(host_from_url("not a url"), "");
        assert_eq!(host_from_url("http://[::1"), "");
        assert_eq!(host_from_url(""), "");
    }

    #[test]
    fn ipv6_host_loses_brackets() {
        assert_eq!(host_from_url("http://[::1]:8080/"), "::1");
    }

    #[test]
    fn host_text_is_kept_as_written() {
        assert_eq!(
            host_from_url("https://Accounts.Example.com:8443/p"),
            "Accounts.Example.com"
        );
        assert_eq!(host_from_url("https://bücher.example/p"), "bücher.example");
    }

    #[test]
    fn userinfo_is_not_part_of_host() {
        assert_eq!(host_from_url("https://user:pw@sso.example.com:443/"), "sso.example.com");
    }
}
