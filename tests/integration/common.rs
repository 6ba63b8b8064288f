use spell_harvest::config::{load_config, Config};
use std::io::Write;
use tempfile::NamedTempFile;

pub const ALARM: &str = include_str!("../fixtures/alarm.html");
pub const ALTERED_STRIKE: &str = include_str!("../fixtures/altered_strike.html");
pub const SPELL_LIST: &str = include_str!("../fixtures/spell_list.html");

/// Listing page whose title column links to the given paths
pub fn listing_page(links: &[&str]) -> String {
    let rows: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<tr><td class="views-field views-field-title"><a href="{}">{}</a></td></tr>"#,
                href, href
            )
        })
        .collect();
    format!(
        "<html><body><table><tbody>{}</tbody></table></body></html>",
        rows
    )
}

/// Loads a config pointing both stages at `server_uri`, without backoff delays
pub fn test_config(server_uri: &str, end_point: u32, extra: &str) -> Config {
    let content = format!(
        r#"
[listing]
base-url = "{uri}/spells"
query-parameters = "?page="
start-point = 0
end-point = {end}

[detail]
base-url = "{uri}"

[retry]
max-attempts = 3
min-backoff-secs = 0
max-backoff-secs = 0
multiplier = 1.0
max-delay-secs = 0

[http]
user-agent = "harvest-tests/1.0"
timeout-secs = 5

{extra}
"#,
        uri = server_uri,
        end = end_point,
        extra = extra
    );

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    load_config(file.path()).unwrap()
}
