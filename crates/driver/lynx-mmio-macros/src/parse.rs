//! Parsing for the `register_block!` DSL.

use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, LitInt, Token, Visibility, braced, bracketed};

/// A complete register block definition.
pub struct RegisterBlock {
    /// Attributes on the struct.
    pub attrs: Vec<Attribute>,
    /// Visibility of the generated struct and constructor.
    pub vis: Visibility,
    /// Name of the generated struct.
    pub name: Ident,
    /// Register definitions.
    pub registers: Vec<RegisterDef>,
}

/// Access mode for a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-only.
    ReadOnly,
    /// Write-only.
    WriteOnly,
    /// Read-write.
    ReadWrite,
}

/// Width of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegWidth {
    /// 8-bit register.
    U8,
    /// 16-bit register.
    U16,
    /// 32-bit register.
    U32,
}

impl RegWidth {
    /// Rust type name for this width.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
        }
    }

    /// `RegisterIo` method suffix for this width.
    pub fn bits(self) -> &'static str {
        match self {
            Self::U8 => "8",
            Self::U16 => "16",
            Self::U32 => "32",
        }
    }
}

/// Stride and length of a register bank.
pub struct Bank {
    /// Distance in bytes between consecutive instances.
    pub stride: LitInt,
    /// Number of instances.
    pub count: LitInt,
}

/// A single register definition.
pub struct RegisterDef {
    /// Attributes on this register.
    pub attrs: Vec<Attribute>,
    /// Byte offset from base.
    pub offset: LitInt,
    /// Register width.
    pub width: RegWidth,
    /// Access mode.
    pub access: AccessMode,
    /// Present for indexed register banks.
    pub bank: Option<Bank>,
    /// Register name (used for method names).
    pub name: Ident,
    /// Optional associated bitflags type.
    pub bitflags_type: Option<Ident>,
}

impl Parse for RegisterBlock {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;

        let content;
        braced!(content in input);

        let mut registers = Vec::new();
        while !content.is_empty() {
            registers.push(content.call(parse_register)?);
        }

        Ok(Self {
            attrs,
            vis,
            name,
            registers,
        })
    }
}

fn parse_width(ident: &Ident) -> syn::Result<RegWidth> {
    match ident.to_string().as_str() {
        "u8" => Ok(RegWidth::U8),
        "u16" => Ok(RegWidth::U16),
        "u32" => Ok(RegWidth::U32),
        _ => Err(syn::Error::new(
            ident.span(),
            "expected register width: u8, u16, or u32",
        )),
    }
}

fn parse_access(ident: &Ident) -> syn::Result<AccessMode> {
    match ident.to_string().as_str() {
        "ro" => Ok(AccessMode::ReadOnly),
        "wo" => Ok(AccessMode::WriteOnly),
        "rw" => Ok(AccessMode::ReadWrite),
        _ => Err(syn::Error::new(
            ident.span(),
            "expected access mode: ro, wo, or rw",
        )),
    }
}

/// Parses one `[offset; width; access (; stride * count)?] name (=> Type)?` line.
fn parse_register(input: ParseStream) -> syn::Result<RegisterDef> {
    let attrs = input.call(Attribute::parse_outer)?;

    let spec;
    bracketed!(spec in input);

    let offset: LitInt = spec.parse()?;
    spec.parse::<Token![;]>()?;
    let width = parse_width(&spec.parse()?)?;
    spec.parse::<Token![;]>()?;
    let access = parse_access(&spec.parse()?)?;

    let bank = if spec.peek(Token![;]) {
        spec.parse::<Token![;]>()?;
        let stride: LitInt = spec.parse()?;
        spec.parse::<Token![*]>()?;
        let count: LitInt = spec.parse()?;
        if count.base10_parse::<usize>()? == 0 {
            return Err(syn::Error::new(count.span(), "register bank must not be empty"));
        }
        Some(Bank { stride, count })
    } else {
        None
    };

    if !spec.is_empty() {
        return Err(spec.error("unexpected tokens in register specifier"));
    }

    let name: Ident = input.parse()?;

    let bitflags_type = if input.peek(Token![=>]) {
        input.parse::<Token![=>]>()?;
        Some(input.parse::<Ident>()?)
    } else {
        None
    };

    if !input.is_empty() {
        input.parse::<Token![,]>()?;
    }

    Ok(RegisterDef {
        attrs,
        offset,
        width,
        access,
        bank,
        name,
        bitflags_type,
    })
}
