pub mod exchangerates_api;

pub use exchangerates_api::ExchangeRatesApiProvider;
