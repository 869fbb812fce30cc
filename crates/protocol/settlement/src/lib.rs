#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod amount;

mod errors;
pub use errors::{AmountError, OrderError, RegistryError, TimelineError};

mod order;
pub use order::{
    MAX_ORDER_DURATION, MAX_PREMIUM_BPS, MAX_SLIPPAGE_BPS, MIN_ORDER_DURATION, Order,
    PlaceOrderRequest,
};

mod registry;
pub use registry::{ChainConfig, ChainRegistry, NativeCurrency, ReactiveNetworkConfig, TokenConfig};

mod status;
pub use status::{OrderStatus, resolve_status};

mod timeline;
pub use timeline::{
    ChainRef, CrossChainEvent, EventStatus, ReactiveTag, Resolution, SettlementTimeline, steps,
};
