//! Proc-macro crate for the `register_block!` register DSL.
//!
//! Generates typed register accessors over any `lynx_mmio::RegisterIo`
//! backend. The backend decides how an access reaches the hardware (volatile
//! MMIO, a byte-swapping adapter, a mock in tests); the generated struct only
//! knows offsets, widths and access modes.

mod codegen;
mod parse;

use proc_macro::TokenStream;
use syn::parse_macro_input;

use crate::parse::RegisterBlock;

/// Generates a typed register block struct, generic over its I/O backend.
///
/// # Syntax
///
/// ```ignore
/// register_block! {
///     /// Doc comment for the struct.
///     pub StructName {
///         /// Doc comment for the register.
///         [offset; width; access_mode] name => OptionalBitflagsType,
///         /// A bank of `count` registers spaced `stride` bytes apart.
///         [offset; width; access_mode; stride * count] bank,
///     }
/// }
/// ```
///
/// - `offset`: byte offset from the backend's base
/// - `width`: `u8`, `u16` or `u32`
/// - `access_mode`: `ro`, `wo` or `rw`
/// - `stride * count`: optional; makes the accessors take an index
/// - `=> Type`: optional bitflags type (needs `from_bits_retain`/`.bits()`)
///
/// # Generated Code
///
/// `pub struct StructName<B> { .. }` with `new(io: B)`, `io()`, and per
/// register:
/// - `ro`/`rw`: `fn name(&self) -> Type` (or `fn name(&self, n: usize)`)
/// - `wo`/`rw`: `fn set_name(&self, value: Type)` (or with a leading `n`)
///
/// # Example
///
/// ```ignore
/// use lynx_mmio::register_block;
///
/// register_block! {
///     /// 10G MDIO controller.
///     pub MdioRegs {
///         [0x30; u32; rw] stat => MdioStat,
///         [0x34; u32; rw] ctl => MdioCtl,
///         [0x38; u32; rw] data,
///         [0x3c; u32; wo] addr,
///     }
/// }
/// ```
#[proc_macro]
pub fn register_block(input: TokenStream) -> TokenStream {
    let block = parse_macro_input!(input as RegisterBlock);
    codegen::generate(&block).into()
}
