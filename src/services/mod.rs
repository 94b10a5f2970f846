pub mod tide_api;
