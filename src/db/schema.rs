use rusqlite::Connection;

/// Initialize the database schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Licenses (issued by an external process, read-only here)
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            key TEXT NOT NULL UNIQUE,
            plan TEXT NOT NULL,
            max_activations INTEGER NOT NULL CHECK (max_activations > 0),
            expires_at INTEGER,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'suspended', 'revoked', 'refunded')),
            created_at INTEGER NOT NULL
        );

        -- Activations (one row per license/site binding, revoked rows kept as history)
        CREATE TABLE IF NOT EXISTS activations (
            id TEXT PRIMARY KEY,
            license_id TEXT NOT NULL REFERENCES licenses(id) ON DELETE CASCADE,
            site_url TEXT NOT NULL,
            site_hash TEXT NOT NULL,
            wp_version TEXT,
            plugin_version TEXT,
            activated_at INTEGER NOT NULL,
            deactivated_at INTEGER,
            last_check_at INTEGER,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'revoked'))
        );
        CREATE INDEX IF NOT EXISTS idx_activations_license_status ON activations(license_id, status);
        -- At most one active activation per site for a license
        CREATE UNIQUE INDEX IF NOT EXISTS idx_activations_active_site
            ON activations(license_id, site_hash) WHERE status = 'active';

        -- Releases (published externally, immutable)
        CREATE TABLE IF NOT EXISTS releases (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL,
            version TEXT NOT NULL,
            changelog TEXT,
            signature TEXT,
            artifact_key TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(slug, version)
        );
        CREATE INDEX IF NOT EXISTS idx_releases_slug_created ON releases(slug, created_at);

        -- Update tokens (expiry is the only invalidation unless single-use is enabled)
        CREATE TABLE IF NOT EXISTS update_tokens (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL,
            version TEXT NOT NULL,
            license_id TEXT NOT NULL REFERENCES licenses(id) ON DELETE CASCADE,
            site_hash TEXT NOT NULL,
            expires_at INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            redeemed_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_update_tokens_expires ON update_tokens(expires_at);

        -- Key-value entries (prompt bundles), value is JSON text
        CREATE TABLE IF NOT EXISTS kv_entries (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )
}
