//! Diesel schema for fingerprint persistence.

diesel::table! {
    /// Fingerprint of the connection settings last applied per foreign server.
    #[sql_name = "_fdw_config_meta"]
    fdw_config_meta (server_name) {
        /// Foreign server name.
        #[max_length = 255]
        server_name -> Varchar,
        /// Hex-encoded SHA-256 fingerprint.
        #[max_length = 64]
        config_hash -> Varchar,
        /// Last write timestamp.
        updated_at -> Nullable<Timestamptz>,
    }
}
