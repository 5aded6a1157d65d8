pub mod rest;

pub use rest::BitflyerClient;
