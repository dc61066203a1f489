//! Reglas de limpieza y modelo dimensional de precios de productos.
//!
//! Entrada: CSV crudo con al menos `product_name` y `price_raw`.
//! Salidas: tabla limpia, `dim_brand`, `dim_product` y `fact_product_price`.
//! Los ids de dimensión son secuenciales desde 1 en orden de primera
//! aparición, así que son estables para una misma entrada.

use crate::table::Table;
use crate::TableError;

pub const PRODUCT_NAME: &str = "product_name";
pub const PRICE_RAW: &str = "price_raw";
pub const PRICE: &str = "price";
pub const TRANSFORM_TIME: &str = "transform_time";
pub const BRAND: &str = "brand";
pub const BRAND_ID: &str = "brand_id";
pub const PRODUCT_ID: &str = "product_id";

pub const FACT_COLUMNS: [&str; 4] = [PRODUCT_ID, BRAND_ID, PRICE, TRANSFORM_TIME];

/// Normaliza un precio con formato local (`20.990.000₫`, `1,500`) a entero.
///
/// Quita el símbolo `₫` y los separadores `.` y `,`; si lo que queda no son
/// sólo dígitos devuelve `None`.
pub fn clean_price(raw: &str) -> Option<i64> {
    let digits: String = raw.replace('₫', "").replace(['.', ','], "");
    let digits = digits.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Marca = primera palabra del nombre del producto.
pub fn brand_of(product_name: &str) -> Option<String> {
    product_name.split_whitespace().next().map(str::to_string)
}

/// Limpieza de la tabla cruda.
///
/// 1. quita filas duplicadas,
/// 2. descarta filas sin `product_name` o `price_raw`,
/// 3. agrega `price` normalizado y descarta las que no parsean,
/// 4. sella `transform_time`.
///
/// # Errores
/// `TableError::MissingColumn` si falta alguna columna requerida.
pub fn clean(raw: &Table, transform_time: &str) -> Result<Table, TableError> {
    let table = raw.drop_duplicates().drop_nulls(&[PRODUCT_NAME, PRICE_RAW])?;
    let table = table.with_column(PRICE, |r| r.get(PRICE_RAW).and_then(clean_price).map(|p| p.to_string()))
                     .drop_nulls(&[PRICE])?;
    Ok(table.with_column(TRANSFORM_TIME, |_| Some(transform_time.to_string())))
}

fn with_brand(clean: &Table) -> Result<Table, TableError> {
    clean.column_index(PRODUCT_NAME)?;
    Ok(clean.with_column(BRAND, |r| r.get(PRODUCT_NAME).and_then(brand_of)))
}

/// `brand, brand_id`
pub fn dim_brand(clean: &Table) -> Result<Table, TableError> {
    Ok(with_brand(clean)?.distinct(&[BRAND])?.with_sequence(BRAND_ID))
}

/// `product_name, brand, brand_id, product_id`
pub fn dim_product(clean: &Table) -> Result<Table, TableError> {
    let branded = with_brand(clean)?;
    let brands = branded.distinct(&[BRAND])?.with_sequence(BRAND_ID);
    Ok(branded.distinct(&[PRODUCT_NAME, BRAND])?
              .left_join(&brands, &[BRAND])?
              .with_sequence(PRODUCT_ID))
}

/// `product_id, brand_id, price, transform_time`, una fila por fila limpia.
///
/// # Errores
/// `TableError::MissingColumn` si `dim_product` no trae las claves foráneas.
pub fn fact_product_price(clean: &Table, dim_product: &Table) -> Result<Table, TableError> {
    for fk in [PRODUCT_ID, BRAND_ID] {
        dim_product.column_index(fk)?;
    }
    with_brand(clean)?.left_join(dim_product, &[PRODUCT_NAME, BRAND])?
                      .select(&FACT_COLUMNS)
}
