/// Generate a request/response client method: builds the oneshot channel,
/// sends the request variant, and maps a closed or dropped actor to the given
/// error variant.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error:ident::$closed:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| $error::$closed("Actor closed".to_string()))?;

                response
                    .await
                    .map_err(|_| $error::$closed("Actor dropped".to_string()))?
            }
        }
    };
}

/// Generate `notify_<kind>` shorthands on a notification client.
macro_rules! notify_methods {
    ($client:ty => $($kind:ident),*) => {
        paste::paste! {
            impl $client {
                $(
                    pub async fn [<notify_ $kind:snake>](&self, message: impl Into<String>) {
                        self.notify(message, NotificationKind::$kind).await
                    }
                )*
            }
        }
    };
}
