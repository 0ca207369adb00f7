//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# footfall configuration
# Only override what you want to change -- missing fields use defaults.
# Command-line flags (--port, --bind, --json-logs) override this file.

[server]
# bind_address = "0.0.0.0"
# port = 4000
# handshake_timeout_secs = 10   # 1-120
# ping_interval_secs = 30       # 5-600
# pong_timeout_secs = 10        # 1-120
# trust_forwarded_for = false   # only behind a proxy that sets X-Forwarded-For

[presence]
# outbound_queue = 16           # 1-1024 snapshots buffered per connection
# max_page_length = 256         # 1-2048
# unknown_page = ""             # page key before a client reports one

[geo]
# enabled = false
# endpoint = "http://ip-api.com/json/{ip}?fields=countryCode"
# timeout_ms = 1500             # 50-10000

[logging]
# filter = "footfall_server=info,footfall_presence=info"
# json = false
"##
    .to_string()
}
