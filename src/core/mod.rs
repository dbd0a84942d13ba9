// Core modules implementing the wire model, value codec, and error modeling.
pub mod deserializer;
pub mod error;
pub mod number;
pub mod regexp;
pub mod script;
pub mod serializer;
pub mod value;
pub mod wire;
