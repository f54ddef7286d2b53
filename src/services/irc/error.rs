use std::io;

/// Errors raised by the IRC channel session
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// Host name could not be resolved
    #[error("cannot resolve {host}: {details}")]
    Resolve {
        /// Host as given on the command line
        host: String,
        /// Resolver error details
        details: String,
    },

    /// TCP connection could not be established
    #[error("could not connect to {host}:{port}: {source}")]
    Connect {
        /// Server host
        host: String,
        /// Server port
        port: u16,
        /// Underlying socket error
        source: io::Error,
    },

    /// A line from the server is not a valid IRC message
    #[error("malformed IRC line: {0:?}")]
    MalformedLine(String),
}
