pub mod exchange;

pub use exchange::{
    load_orders, load_world, orders_from_json, orders_to_json, save_orders, save_world,
    world_from_json, world_to_json, ExchangeError,
};
