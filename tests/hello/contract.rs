//! The `hello` contract: greets users, counts visits, and calls itself.

use serde::{Deserialize, Serialize};
use tessera::{
    CallArgs, CallContext, Contract, Error, Name, Result, SchemaRegistry, Singleton, Table,
    TableSchema, Timestamp,
};

/// One greeted user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub name: Name,
    pub count: u32,
    pub last_seen: Timestamp,
}

/// Process-wide counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub users: u32,
    pub visits: u32,
}

pub struct Hello {
    pub greetings: Table<Greeting, Name>,
    pub hello: Table<Greeting, Name>,
    pub counter: Singleton<Stats>,
}

impl Hello {
    pub fn new() -> Result<Self> {
        Ok(Self {
            greetings: Table::new(
                TableSchema::builder("table_greetings", |g: &Greeting| g.name.clone())
                    .secondary("count", |g: &Greeting| g.count)
                    .secondary("last_seen", |g: &Greeting| g.last_seen)
                    .build()?,
            ),
            hello: Table::new(TableSchema::new("hello", |g: &Greeting| g.name.clone())),
            counter: Singleton::new("global_counters"),
        })
    }

    fn hi(&self, ctx: &mut CallContext<'_>, user: Name) -> Result<()> {
        self.counter.get_or_create(ctx)?;
        let now = ctx.current_timestamp();

        if !self.greetings.has(ctx, &user)? {
            self.greetings.insert(ctx, |g| {
                g.name = user.clone();
                g.count = 1;
                g.last_seen = now;
            })?;
            self.counter.update(ctx, |s| {
                s.users += 1;
                s.visits += 1;
            })?;
        } else {
            self.greetings.update(ctx, &user, |g| {
                g.count += 1;
                g.last_seen = now;
            })?;
            self.counter.update(ctx, |s| s.visits += 1)?;
        }

        let greeting = self.greetings.get(ctx, &user)?;
        let stats = self.counter.get(ctx)?;
        ctx.print(format!(
            "Hello {}, we have met {} times. I have greeted {} persons, {} greetings in total.",
            user, greeting.count, stats.users, stats.visits
        ));

        let me = ctx.contract_name().clone();
        ctx.execute(me, "add", 0, CallArgs::encode(&(123456i32, 789i32))?)?;

        ctx.print("Cool, I just called another contract :)");
        Ok(())
    }

    fn add(&self, ctx: &mut CallContext<'_>, a: i32, b: i32) -> Result<()> {
        let sum = a
            .checked_add(b)
            .ok_or_else(|| Error::abort("integer overflow"))?;
        ctx.print(format!("sum of {} and {} is {}", a, b, sum));
        Ok(())
    }
}

impl Contract for Hello {
    fn methods(&self) -> &[&'static str] {
        &["hi", "add"]
    }

    fn schema(&self) -> Result<SchemaRegistry> {
        SchemaRegistry::builder()
            .table(&self.greetings)
            .table(&self.hello)
            .singleton(&self.counter)
            .build()
    }

    fn invoke(&self, ctx: &mut CallContext<'_>, method: &str, args: &CallArgs) -> Result<()> {
        match method {
            "hi" => {
                let (user,): (Name,) = args.decode()?;
                self.hi(ctx, user)
            }
            "add" => {
                let (a, b): (i32, i32) = args.decode()?;
                self.add(ctx, a, b)
            }
            other => Err(Error::MethodNotFound {
                contract: ctx.contract_name().clone(),
                method: other.to_string(),
            }),
        }
    }
}
