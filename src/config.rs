//! Runtime configuration for the listener, queue and window.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::color::Color;
use crate::decoder::DEFAULT_NAMESPACE;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Address prefix every routed message must start with, for example `/sg`.
    pub namespace: String,
    pub queue_capacity: usize,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub clear_color: Color,
    pub vsync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            namespace: DEFAULT_NAMESPACE.to_string(),
            queue_capacity: DEFAULT_CAPACITY,
            width: 640,
            height: 480,
            fps: DEFAULT_FPS,
            clear_color: Color::BLACK,
            vsync: true,
        }
    }
}

impl Config {
    /// Parses command line arguments, not including the program name.
    ///
    /// Accepts an optional positional `WIDTH HEIGHT` pair and the options `--port N`,
    /// `--namespace S`, `--capacity N`, `--fps N` and `--no-vsync`. The result is validated.
    ///
    /// # Examples
    ///
    /// ```
    /// use oscscene::Config;
    ///
    /// let config = Config::from_args(["1280", "720", "--port", "9000"]).unwrap();
    /// assert_eq!((config.width, config.height, config.port), (1280, 720, 9000));
    /// ```
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();
        let mut positional = Vec::new();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--port" => config.port = parse(&mut args, "--port")?,
                "--namespace" => config.namespace = value(&mut args, "--namespace")?,
                "--capacity" => config.queue_capacity = parse(&mut args, "--capacity")?,
                "--fps" => config.fps = parse(&mut args, "--fps")?,
                "--no-vsync" => config.vsync = false,
                other if other.starts_with("--") => {
                    return Err(ConfigError::UnexpectedArgument(other.to_string()));
                }
                _ => positional.push(arg),
            }
        }

        match positional.as_slice() {
            [] => {}
            [width, height] => {
                config.width = parse_value("WIDTH", width)?;
                config.height = parse_value("HEIGHT", height)?;
            }
            [_] => return Err(ConfigError::MissingValue("HEIGHT")),
            [_, _, extra, ..] => return Err(ConfigError::UnexpectedArgument(extra.clone())),
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroWindowSize(self.width, self.height));
        }
        if !self.namespace.starts_with('/') || self.namespace.ends_with('/') {
            return Err(ConfigError::InvalidNamespace(self.namespace.clone()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

fn value(args: &mut impl Iterator<Item = String>, option: &'static str) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue(option))
}

fn parse<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    option: &'static str,
) -> Result<T, ConfigError> {
    let raw = value(args, option)?;
    parse_value(option, &raw)
}

fn parse_value<T: std::str::FromStr>(option: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        option,
        value: raw.to_string(),
    })
}
