pub mod client;
pub mod error;
pub mod interactive;

#[cfg(test)]
mod test_client;

pub use client::FtpClient;
pub use interactive::run;
