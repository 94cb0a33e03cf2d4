use crate::storage::{Student, StudentStore};

/// Commands that control the REPL session itself rather than the store.
#[derive(Debug, Clone)]
pub enum MetaCommand {
    /// Save to the data file and close the session
    Exit,
    /// Print a command summary
    Help,
}

impl MetaCommand {
    pub fn print_help() {
        println!("insert <id> <age> <grade> <name>  add a student");
        println!("list                              students by id");
        println!("grades                            students by grade, highest first");
        println!("find <id>                         look one student up");
        println!("update <id> name|age|grade <v>    edit one field");
        println!("delete <id>                       remove a student");
        println!(".help                             this summary");
        println!(".exit                             save and quit");
    }
}

impl TryInto<MetaCommand> for &str {
    type Error = String;

    fn try_into(self) -> Result<MetaCommand, Self::Error> {
        match self {
            ".exit" => Ok(MetaCommand::Exit),
            ".help" => Ok(MetaCommand::Help),
            _ => Err(format!("unknown command `{self}`.")),
        }
    }
}

/// One field of a record the `update` statement may touch. The id is
/// deliberately not here; re-keying is delete + insert.
#[derive(Debug, Clone)]
pub enum Field {
    Name(String),
    Age(i32),
    Grade(f64),
}

/// Store statements accepted by the REPL.
#[derive(Debug, Clone)]
pub enum Statement {
    Insert(Student),
    List,
    Grades,
    Find(i32),
    Update(i32, Field),
    Delete(i32),
}

impl Statement {
    pub fn execute(self, store: &mut StudentStore) {
        match self {
            Self::Insert(student) => match store.insert(student) {
                Ok(()) => println!("Student added!"),
                Err(e) => println!("error: {e}"),
            },
            Self::List => {
                let records = store.in_key_order();
                if records.is_empty() {
                    println!("-- No students found in the system --");
                    return;
                }
                println!("-- Students (by ID) --");
                for record in records {
                    println!("{record}");
                }
            }
            Self::Grades => {
                let records = store.by_grade_desc();
                if records.is_empty() {
                    println!("-- No students found in the system --");
                    return;
                }
                println!("-- Students (by Grade desc) --");
                for record in records {
                    println!("{}: {} (ID {})", record.grade, record.name, record.id());
                }
            }
            Self::Find(id) => match store.find(id) {
                Some(record) => println!("Found: {record}"),
                None => println!("No student with ID {id}"),
            },
            Self::Update(id, field) => match store.find_mut(id) {
                Some(record) => {
                    match field {
                        Field::Name(name) => record.name = name,
                        Field::Age(age) => record.age = age,
                        Field::Grade(grade) => record.grade = grade,
                    }
                    println!("Updated student {id}");
                }
                None => println!("No student with ID {id}"),
            },
            Self::Delete(id) => {
                if store.remove(id).is_some() {
                    println!("Deleted");
                } else {
                    println!("Not found");
                }
            }
        }
    }
}

impl TryInto<Statement> for &str {
    type Error = String;

    fn try_into(self) -> Result<Statement, Self::Error> {
        let mut parts = self.split_whitespace();
        let keyword = parts.next().unwrap_or_default();

        match keyword {
            "insert" => {
                let id = parse_id(parts.next())?;
                let age = parse_age(parts.next())?;
                let grade = parse_grade(parts.next())?;
                let name = parse_name(&parts.collect::<Vec<_>>().join(" "))?;
                Ok(Statement::Insert(Student::new(id, name, age, grade)))
            }
            "list" => Ok(Statement::List),
            "grades" => Ok(Statement::Grades),
            "find" => Ok(Statement::Find(parse_id(parts.next())?)),
            "update" => {
                let id = parse_id(parts.next())?;
                let field = match parts.next() {
                    Some("name") => {
                        Field::Name(parse_name(&parts.collect::<Vec<_>>().join(" "))?)
                    }
                    Some("age") => Field::Age(parse_age(parts.next())?),
                    Some("grade") => Field::Grade(parse_grade(parts.next())?),
                    _ => return Err("expected a field: name, age or grade".into()),
                };
                Ok(Statement::Update(id, field))
            }
            "delete" => Ok(Statement::Delete(parse_id(parts.next())?)),
            _ => Err(format!("unknown statement `{self}`.")),
        }
    }
}

fn parse_id(token: Option<&str>) -> Result<i32, String> {
    token
        .ok_or("expected an id".to_string())?
        .parse()
        .map_err(|_| "invalid id; expected an integer".into())
}

fn parse_age(token: Option<&str>) -> Result<i32, String> {
    let age: i32 = token
        .ok_or("expected an age".to_string())?
        .parse()
        .map_err(|_| "invalid age; expected an integer".to_string())?;

    if !(1..=120).contains(&age) {
        return Err("invalid age; must be between 1 and 120".into());
    }
    Ok(age)
}

fn parse_grade(token: Option<&str>) -> Result<f64, String> {
    token
        .ok_or("expected a grade".to_string())?
        .parse()
        .map_err(|_| "invalid grade; expected a number".into())
}

fn parse_name(name: &str) -> Result<String, String> {
    if name.is_empty() || name.chars().count() > 40 {
        return Err("invalid name; must be 1 to 40 characters".into());
    }
    Ok(name.to_string())
}
