use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::{TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::{Attribute, Meta};

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Whether the attribute is `#[serde(..)]` containing `skip` or `skip_deserializing`.
fn skips_deserializing(attr: &Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	list.path.is_ident("serde")
		&& list.tokens.to_token_stream().into_iter().any(|token| {
			matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
		})
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);

	match expand(&input) {
		Ok(tokens) => tokens.into(),
		Err(e) => e.write_errors().into(),
	}
}

fn expand(input: &syn::DeriveInput) -> darling::Result<TokenStream> {
	let receiver = ModelInputReceiver::from_derive_input(input)?;

	let vis = &input.vis;
	let generics = &receiver.generics;
	let create_ident = format_ident!("Create{}", receiver.ident);
	let attrs = &receiver.attrs;

	let fields = receiver
		.data
		.take_struct()
		.ok_or_else(|| darling::Error::unsupported_shape("enum"))?;

	let create_fields = fields
		.iter()
		.filter(|field| !field.attrs.iter().any(skips_deserializing))
		.filter_map(|field| {
			let ident = field.ident.as_ref()?;
			let ty = &field.ty;
			let attrs = &field.attrs;
			let vis = &field.vis;

			Some(quote! {
				#(#attrs)*
				#vis #ident: #ty,
			})
		});

	Ok(quote! {
		#input

		#(#attrs)*
		#vis struct #create_ident #generics {
			#(
				#create_fields
			)*
		}
	})
}
