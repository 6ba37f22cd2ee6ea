use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, start a mock of the
/// remote API for it, and inject dependencies.
///
/// Injectable dependencies are `crate::api::ApiClient`, `crate::mock::Backend`
/// and `crate::session::SessionStore`. Use `#[client_test(voter)]` or
/// `#[client_test(admin)]` to have the session signed in before the test runs.
#[proc_macro_attribute]
pub fn client_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the arguments to pass and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Sign the session in as admin/voter if needed.
    let login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "admin" => quote! { Some(crate::model::Role::Admin) },
        Some(arg) if arg == "voter" => quote! { Some(crate::model::Role::Voter) },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `voter` or `admin`")
                .into_compile_error()
                .into();
        }
        None => quote! { None },
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// The test itself.
            #item_fn

            // Claim the global logger before the mock server can.
            log4rs_test_utils::test_logging::init_logging_once_for(
                ["vote_client"],
                None,
                None,
            );

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .thread_name("client-test")
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            // The mock server lives on this runtime and stops when it is dropped.
            runtime.block_on(async {
                #[allow(unused_variables)]
                let (api, backend, session) = crate::mock::setup(#login).await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_api = false;
    let mut has_backend = false;
    let mut has_session = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                if let Some(type_ident) = type_path.path.segments.last().map(|s| &s.ident) {
                    let (seen, arg, full_name) = if type_ident == "ApiClient" {
                        (&mut has_api, quote! { api }, "crate::api::ApiClient")
                    } else if type_ident == "Backend" {
                        (&mut has_backend, quote! { backend }, "crate::mock::Backend")
                    } else if type_ident == "SessionStore" {
                        (
                            &mut has_session,
                            quote! { session },
                            "crate::session::SessionStore",
                        )
                    } else {
                        return Err(unexpected(input));
                    };
                    if *seen {
                        return Err(syn::Error::new(
                            input.span(),
                            format!("Test cannot accept more than one `{full_name}`"),
                        ));
                    }
                    *seen = true;
                    args.push(arg);
                    continue;
                }
            }
        }

        return Err(unexpected(input));
    }

    Ok(args)
}

fn unexpected(input: &FnArg) -> syn::Error {
    syn::Error::new(
        input.span(),
        "Expected one of `api_ident: ApiClient`, `backend_ident: Backend` or `session_ident: SessionStore`",
    )
}
