use darling::ast::NestedMeta;
use darling::{Error, FromMeta};
use proc_macro::TokenStream;
use quote::quote;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, FromMeta)]
struct TimedMacroArgs {
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    kind: Option<String>,
    #[darling(default)]
    attributes: Option<HashMap<String, String>>,
}

/// Publishes a metric after every call of the annotated (sync or async) function. The metric carries
/// a `duration` attribute with the run time of the function in milliseconds and all static
/// `attributes`. The `kind` is either `functional`, `technical` (default) or any other non-empty
/// custom type. The `name` defaults to the function name.
///
/// ```ignore
/// #[timed(name = "checkout", kind = "functional", attributes(shop = "main"))]
/// async fn checkout(cart: Cart) -> Result<Order, Error> { ... }
/// ```
#[proc_macro_attribute]
pub fn timed(args: TokenStream, input: TokenStream) -> TokenStream {
    timed_impl(args.into(), input.into()).into()
}

fn timed_impl(
    args: proc_macro2::TokenStream,
    input: proc_macro2::TokenStream,
) -> proc_macro2::TokenStream {
    // parse input function and handle parse errors
    let input_fn: syn::ItemFn = match syn::parse2::<syn::ItemFn>(input) {
        Ok(is) => is,
        Err(e) => {
            return Error::from(e).write_errors();
        }
    };

    // parse attributes using darling and handle errors
    let attr_args = match NestedMeta::parse_meta_list(args) {
        Ok(v) => v,
        Err(e) => return Error::from(e).write_errors(),
    };
    let args = match TimedMacroArgs::from_list(&attr_args) {
        Ok(v) => v,
        Err(e) => {
            return e.write_errors();
        }
    };

    let fn_attrs = &input_fn.attrs;
    let fn_head = &input_fn.sig;
    let fn_vis = &input_fn.vis;
    let fn_block = &input_fn.block;
    let name = args.name.unwrap_or_else(|| fn_head.ident.to_string());
    // sorted, so the expansion is deterministic
    let attributes: BTreeMap<String, String> =
        args.attributes.unwrap_or_default().into_iter().collect();

    let constructor = match args.kind.as_deref() {
        None => quote! { ::metrics_publisher::Metric::technical(#name) },
        Some(kind) if kind.eq_ignore_ascii_case("technical") => {
            quote! { ::metrics_publisher::Metric::technical(#name) }
        }
        Some(kind) if kind.eq_ignore_ascii_case("functional") => {
            quote! { ::metrics_publisher::Metric::functional(#name) }
        }
        Some("") => {
            return Error::custom("metric kind must not be empty")
                .with_span(&fn_head.ident)
                .write_errors();
        }
        Some(kind) => quote! { ::metrics_publisher::Metric::custom(#name, #kind) },
    };

    let inner_fn = match fn_head.asyncness {
        Some(_) => quote! {
            (|| async move { #fn_block })().await
        },
        None => quote! {
            (move || { #fn_block })()
        },
    };

    let attribute_keys = attributes.keys();
    let attribute_values = attributes.values();
    quote! {
        #(#fn_attrs)*
        #fn_vis #fn_head {
            let start = ::std::time::Instant::now();
            let result = #inner_fn;

            #constructor
                .add_attribute("duration", start.elapsed().as_millis())
                #(.add_attribute(#attribute_keys, #attribute_values))*
                .publish();
            result
        }
    }
}
