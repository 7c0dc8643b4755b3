// Events module - THE OBSERVABLE HISTORY
// Ledger notifications, their sinks, and their wire encoding

mod codec;
mod model;
mod sink;

pub use codec::{CodecError, EventCodec};
pub use model::LedgerEvent;
pub use sink::{EventBus, EventLog, EventSink, SinkError, DEFAULT_BUS_CAPACITY};
