//! Code generation for the `register_block!` macro.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::parse::{AccessMode, RegisterBlock, RegisterDef};

/// Generates the struct and its accessor impl.
pub fn generate(block: &RegisterBlock) -> TokenStream {
    let vis = &block.vis;
    let name = &block.name;
    let attrs = &block.attrs;

    let methods: Vec<TokenStream> = block.registers.iter().map(generate_methods).collect();

    quote! {
        #(#attrs)*
        #vis struct #name<B> {
            io: B,
        }

        impl<B: ::lynx_mmio::RegisterIo> #name<B> {
            /// Wraps a register backend positioned at the block's base.
            #vis const fn new(io: B) -> Self {
                Self { io }
            }

            /// Returns the underlying register backend.
            #[must_use]
            #vis fn io(&self) -> &B {
                &self.io
            }

            #(#methods)*
        }
    }
}

fn generate_methods(reg: &RegisterDef) -> TokenStream {
    let mut methods = TokenStream::new();
    if reg.access != AccessMode::WriteOnly {
        methods.extend(generate_read(reg));
    }
    if reg.access != AccessMode::ReadOnly {
        methods.extend(generate_write(reg));
    }
    methods
}

/// Index parameter, offset expression and bounds check for a register.
fn addressing(reg: &RegisterDef) -> (TokenStream, TokenStream, TokenStream) {
    let offset = &reg.offset;
    match &reg.bank {
        Some(bank) => {
            let stride = &bank.stride;
            let count = &bank.count;
            (
                quote! { n: usize, },
                quote! { #offset + n * #stride },
                quote! { debug_assert!(n < #count, "register bank index out of range"); },
            )
        }
        None => (quote! {}, quote! { #offset }, quote! {}),
    }
}

fn generate_read(reg: &RegisterDef) -> TokenStream {
    let name = &reg.name;
    let attrs = &reg.attrs;
    let width_ty = format_ident!("{}", reg.width.type_name());
    let read = format_ident!("read{}", reg.width.bits());
    let (param, offset, check) = addressing(reg);

    match &reg.bitflags_type {
        Some(bf_type) => quote! {
            #(#attrs)*
            #[inline]
            pub fn #name(&self, #param) -> #bf_type {
                #check
                #bf_type::from_bits_retain(self.io.#read(#offset))
            }
        },
        None => quote! {
            #(#attrs)*
            #[inline]
            pub fn #name(&self, #param) -> #width_ty {
                #check
                self.io.#read(#offset)
            }
        },
    }
}

fn generate_write(reg: &RegisterDef) -> TokenStream {
    let name = &reg.name;
    let setter = format_ident!("set_{}", name);
    let width_ty = format_ident!("{}", reg.width.type_name());
    let write = format_ident!("write{}", reg.width.bits());
    let (param, offset, check) = addressing(reg);
    let set_doc = format!("Writes the `{name}` register.");

    match &reg.bitflags_type {
        Some(bf_type) => quote! {
            #[doc = #set_doc]
            #[inline]
            pub fn #setter(&self, #param value: #bf_type) {
                #check
                self.io.#write(#offset, value.bits());
            }
        },
        None => quote! {
            #[doc = #set_doc]
            #[inline]
            pub fn #setter(&self, #param value: #width_ty) {
                #check
                self.io.#write(#offset, value);
            }
        },
    }
}
