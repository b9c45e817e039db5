use crate::transports::TlsConfig;
use crate::{FileTransport, Mailer, MailerError, SendmailTransport, SmtpTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Selects and configures the mail transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
        tls: Option<TlsType>,
    },
    File {
        output_dir: PathBuf,
    },
    Sendmail {
        command: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    None,
    StartTls,
    Tls,
}

impl From<TlsType> for TlsConfig {
    fn from(tls_type: TlsType) -> Self {
        match tls_type {
            TlsType::None => TlsConfig::None,
            TlsType::StartTls => TlsConfig::StartTls,
            TlsType::Tls => TlsConfig::Tls,
        }
    }
}

impl MailerConfig {
    /// Read the transport settings from `ENROLL_MAILER_*` environment variables.
    ///
    /// SMTP wins over the file transport, which wins over sendmail. With nothing set,
    /// mail is written to `./emails`.
    pub fn from_env() -> Result<Self, MailerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = if let Some(smtp_host) = lookup("ENROLL_MAILER_SMTP_HOST") {
            let port = match lookup("ENROLL_MAILER_SMTP_PORT") {
                Some(port) => Some(port.parse().map_err(|_| {
                    MailerError::Config(format!("Invalid ENROLL_MAILER_SMTP_PORT: {port}"))
                })?),
                None => None,
            };

            TransportConfig::Smtp {
                host: smtp_host,
                port,
                username: lookup("ENROLL_MAILER_SMTP_USERNAME"),
                password: lookup("ENROLL_MAILER_SMTP_PASSWORD"),
                tls: lookup("ENROLL_MAILER_SMTP_TLS").and_then(|t| {
                    match t.to_lowercase().as_str() {
                        "none" => Some(TlsType::None),
                        "starttls" => Some(TlsType::StartTls),
                        "tls" => Some(TlsType::Tls),
                        _ => None,
                    }
                }),
            }
        } else if let Some(output_dir) = lookup("ENROLL_MAILER_FILE_OUTPUT_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else if lookup("ENROLL_MAILER_SENDMAIL").is_some() {
            TransportConfig::Sendmail {
                command: lookup("ENROLL_MAILER_SENDMAIL_COMMAND"),
            }
        } else {
            // Default to file transport for development
            TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            }
        };

        Ok(Self { transport })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::Smtp {
                host,
                port,
                username,
                password,
                tls,
            } => {
                let mut builder = SmtpTransport::builder(host);

                if let Some(port) = port {
                    builder = builder.port(*port);
                }

                if let (Some(username), Some(password)) = (username, password) {
                    builder = builder.credentials(username, password);
                }

                if let Some(tls) = tls {
                    builder = builder.tls(tls.clone().into());
                }

                Ok(Box::new(builder.build()?))
            }
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
            TransportConfig::Sendmail { command } => match command {
                Some(command) => Ok(Box::new(SendmailTransport::with_command(command))),
                None => Ok(Box::new(SendmailTransport::new())),
            },
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = MailerConfig::default();

        match config.transport {
            TransportConfig::File { output_dir } => {
                assert_eq!(output_dir, PathBuf::from("./emails"));
            }
            _ => panic!("Expected file transport"),
        }
    }

    #[test]
    fn test_smtp_from_lookup() {
        let config = MailerConfig::from_lookup(lookup(&[
            ("ENROLL_MAILER_SMTP_HOST", "smtp.example.com"),
            ("ENROLL_MAILER_SMTP_PORT", "2525"),
            ("ENROLL_MAILER_SMTP_TLS", "StartTLS"),
            ("ENROLL_MAILER_FILE_OUTPUT_DIR", "/tmp/ignored"),
        ]))
        .unwrap();

        assert_eq!(
            config.transport,
            TransportConfig::Smtp {
                host: "smtp.example.com".to_string(),
                port: Some(2525),
                username: None,
                password: None,
                tls: Some(TlsType::StartTls),
            }
        );
    }

    #[test]
    fn test_invalid_smtp_port() {
        let result = MailerConfig::from_lookup(lookup(&[
            ("ENROLL_MAILER_SMTP_HOST", "smtp.example.com"),
            ("ENROLL_MAILER_SMTP_PORT", "not-a-port"),
        ]));

        assert!(matches!(result, Err(MailerError::Config(_))));
    }

    #[test]
    fn test_sendmail_from_lookup() {
        let config = MailerConfig::from_lookup(lookup(&[
            ("ENROLL_MAILER_SENDMAIL", "1"),
            ("ENROLL_MAILER_SENDMAIL_COMMAND", "/usr/sbin/sendmail"),
        ]))
        .unwrap();

        assert_eq!(
            config.transport,
            TransportConfig::Sendmail {
                command: Some("/usr/sbin/sendmail".to_string()),
            }
        );
    }

    #[test]
    fn test_build_file_transport() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = MailerConfig {
            transport: TransportConfig::File {
                output_dir: temp_dir.path().to_path_buf(),
            },
        };

        assert!(config.build_transport().is_ok());
    }
}
