//! Request handlers joining the stores to the response envelope.
//!
//! Each handler writes exactly one envelope to the exchange. Path parameters
//! are read by name: `id` for a sale, `cart` for a cart, `user` for a user
//! and `product` for a product.

use crate::{
    CartStore, OrderDir, Paging, Sale, SaleDetail, SaleRepository, SalesError, SalesResult,
    SortColumn,
};
use serde::Serialize;
use till_api::{ApiConfig, ApiExchange, Method, RequestDataIds, ResponseSink};
use uuid::Uuid;

/// A page of sales with the overall count.
#[derive(Debug, Clone, Serialize)]
pub struct SalePage {
    pub total: i64,
    pub sales: Vec<Sale>,
}

/// Sales and cart endpoints over a repository and a cart store.
#[derive(Debug)]
pub struct SalesApi<R> {
    repo: R,
    carts: CartStore,
    config: ApiConfig,
}

impl<R: SaleRepository> SalesApi<R> {
    pub fn new(repo: R, carts: CartStore) -> Self {
        Self {
            repo,
            carts,
            config: ApiConfig::default(),
        }
    }

    /// Use `config` for every exchange made by [`exchange`](Self::exchange).
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Start an exchange for `method uri` carrying this service's media type.
    pub fn exchange<S: ResponseSink>(
        &self,
        sink: S,
        method: Method,
        uri: impl Into<String>,
    ) -> ApiExchange<S> {
        ApiExchange::new(sink, method, uri).with_config(&self.config)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    /// `GET /sales?start=&length=&keyword=&order=&order_dir=`
    pub fn list_sales<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = paging_from(api).and_then(|paging| {
            Ok(SalePage {
                total: self.repo.count_all()?,
                sales: self.repo.list(&paging)?,
            })
        });
        finish(api, result);
    }

    /// `GET /sales/{id}`
    pub fn get_sale<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = path_id(api, "id").and_then(|id| self.repo.get(id));
        finish(api, result);
    }

    /// `POST /sales` with a sale body.
    pub fn create_sale<S: ResponseSink>(&self, api: &mut ApiExchange<S>, body: &[u8]) {
        let result = api
            .decode_body::<Sale>(body)
            .map_err(SalesError::from)
            .and_then(|sale| self.repo.insert(sale));
        finish(api, result);
    }

    /// `PUT /sales/{id}` with a sale body. The path id wins over the body's.
    pub fn update_sale<S: ResponseSink>(&self, api: &mut ApiExchange<S>, body: &[u8]) {
        let result = path_id(api, "id").and_then(|id| {
            let mut sale: Sale = api.decode_body(body)?;
            sale.uid = id;
            self.repo.update(&sale)
        });
        finish(api, result);
    }

    /// `DELETE /sales/{id}`
    pub fn delete_sale<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = path_id(api, "id").and_then(|id| {
            let sale = self.repo.get(id)?;
            self.repo.delete(&sale)?;
            Ok(sale.uid)
        });
        finish(api, result);
    }

    /// `POST /sales/delete` with `{"data": {"ids": [...]}}`.
    pub fn delete_sales<S: ResponseSink>(&self, api: &mut ApiExchange<S>, body: &[u8]) {
        let result = api
            .decode_body::<RequestDataIds>(body)
            .map_err(SalesError::from)
            .and_then(|request| {
                self.repo.delete_bulk(&request.data.ids)?;
                Ok(request.data.ids)
            });
        finish(api, result);
    }

    /// `POST /users/{user}/carts`
    pub fn new_cart<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = path_id(api, "user")
            .and_then(|user| Ok(self.carts.create_user_cart(user)?));
        finish(api, result);
    }

    /// `GET /users/{user}/carts`
    pub fn user_carts<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = path_id(api, "user").and_then(|user| Ok(self.carts.get_user_carts(user)?));
        finish(api, result);
    }

    /// `POST /carts/{cart}/items/{product}`
    pub fn add_cart_item<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = path_id(api, "cart").and_then(|cart| {
            let product = path_id(api, "product")?;
            Ok(self.carts.add_cart_item(&Sale::with_uid(cart), product)?)
        });
        finish(api, result);
    }

    /// `GET /carts/{cart}/items`
    pub fn cart_items<S: ResponseSink>(&self, api: &mut ApiExchange<S>) {
        let result = path_id(api, "cart")
            .and_then(|cart| Ok(self.carts.get_cart_items(&Sale::with_uid(cart))?));
        finish(api, result);
    }

    /// `POST /carts/{cart}/checkout` with a sale body.
    ///
    /// The cart decides which products are sold; the body supplies the sale
    /// fields and one priced line per product. The cart entry is left in the
    /// cache, and a failure after the sale row is written is not rolled back.
    pub fn checkout_cart<S: ResponseSink>(&self, api: &mut ApiExchange<S>, body: &[u8]) {
        let result = path_id(api, "cart").and_then(|cart| {
            let sale: Sale = api.decode_body(body)?;
            let items = self.carts.get_cart_items(&Sale::with_uid(cart))?;
            self.repo.insert(priced_sale(cart, sale, &items)?)
        });
        finish(api, result);
    }
}

/// Build the sale for a checkout: one line per cart item, priced from the
/// matching line in `sale.detail`.
fn priced_sale(cart: Uuid, mut sale: Sale, items: &[Uuid]) -> SalesResult<Sale> {
    if items.is_empty() {
        return Err(SalesError::EmptyCart(cart));
    }

    let detail = items
        .iter()
        .map(|product| {
            sale.detail
                .iter()
                .find(|line| line.product == *product)
                .map(|line| SaleDetail::new(*product, line.quantity, line.price))
                .ok_or(SalesError::UnpricedItem(*product))
        })
        .collect::<SalesResult<Vec<_>>>()?;

    sale.detail = detail;
    Ok(sale)
}

fn path_id<S: ResponseSink>(api: &ApiExchange<S>, key: &str) -> SalesResult<Uuid> {
    let raw = api.path_var(key);
    Uuid::parse_str(raw)
        .map_err(|e| SalesError::InvalidRequest(format!("{} {:?}: {}", key, raw, e)))
}

fn paging_from<S: ResponseSink>(api: &ApiExchange<S>) -> SalesResult<Paging> {
    fn number(raw: &str, key: &str) -> SalesResult<i64> {
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| SalesError::InvalidRequest(format!("{} must be a number", key)))
    }

    let order = match api.form_value("order") {
        "" => None,
        raw => Some(raw.parse::<SortColumn>().map_err(SalesError::InvalidRequest)?),
    };
    let order_dir = match api.form_value("order_dir") {
        "" => Default::default(),
        raw => raw.parse::<OrderDir>().map_err(SalesError::InvalidRequest)?,
    };

    Ok(Paging {
        start: number(api.form_value("start"), "start")?,
        length: number(api.form_value("length"), "length")?,
        keyword: api.form_value("keyword").to_string(),
        order,
        order_dir,
    })
}

fn finish<S: ResponseSink, T: Serialize>(api: &mut ApiExchange<S>, result: SalesResult<T>) {
    match result {
        Ok(value) => api.emit_success(&value),
        Err(e) => {
            let status = e.status_code();
            api.emit_error(&e, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priced_sale_follows_cart_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let body = Sale {
            detail: vec![SaleDetail::new(b, 1, 3.0), SaleDetail::new(a, 2, 1.5)],
            ..Sale::default()
        };

        let sale = priced_sale(Uuid::new_v4(), body, &[a, b]).unwrap();
        let products: Vec<Uuid> = sale.detail.iter().map(|l| l.product).collect();
        assert_eq!(products, vec![a, b]);
        assert_eq!(sale.detail[0].subtotal, 3.0);
    }

    #[test]
    fn test_priced_sale_drops_lines_not_in_cart() {
        let a = Uuid::new_v4();
        let body = Sale {
            detail: vec![SaleDetail::new(a, 1, 1.0), SaleDetail::new(Uuid::new_v4(), 1, 9.0)],
            ..Sale::default()
        };
        let sale = priced_sale(Uuid::new_v4(), body, &[a]).unwrap();
        assert_eq!(sale.detail.len(), 1);
    }

    #[test]
    fn test_priced_sale_requires_prices() {
        let a = Uuid::new_v4();
        let err = priced_sale(Uuid::new_v4(), Sale::default(), &[a]).unwrap_err();
        assert!(matches!(err, SalesError::UnpricedItem(id) if id == a));
    }

    #[test]
    fn test_priced_sale_rejects_empty_cart() {
        let cart = Uuid::new_v4();
        let err = priced_sale(cart, Sale::default(), &[]).unwrap_err();
        assert!(matches!(err, SalesError::EmptyCart(id) if id == cart));
    }
}
